use anyhow::{bail, Context};
use clap::Parser;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use meal_log::cli::{Cli, Commands};
use meal_log::config::Config;
use meal_log::controller::Controller;
use meal_log::display::{render_history, render_history_line, render_record};
use meal_log::history::{FileSlot, HistoryStore, SlotStorage};
use meal_log::logging;
use meal_log_common::{Event, MealType, NutritionRecord, Screen};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Session => {
            println!("🥗 meal-log - 食事記録\n");
            let controller = Controller::from_config(&config)?;
            run_session(controller).await?;
        }

        Commands::Analyze { image, camera, meal_type, notes, log, json } => {
            let mut controller = Controller::from_config(&config)?;

            // 1. 入力の取り込み
            if camera {
                controller.dispatch(Event::OpenCamera).await;
                if controller.state().screen == Screen::Capture {
                    controller.take_photo().await;
                }
            } else if let Some(path) = image {
                controller.upload(&path).await;
            } else {
                controller.dispatch(Event::ChooseTextOnly).await;
            }
            fail_on_error(&controller)?;

            // 2. 解析
            controller.dispatch(Event::SetMealType(meal_type)).await;
            controller.dispatch(Event::SetNotes(notes)).await;
            let pb = spinner("Analyzing your meal...");
            controller.dispatch(Event::SubmitAnalysis).await;
            pb.finish_and_clear();
            fail_on_error(&controller)?;

            // 3. 記録
            if log {
                let pb = spinner("Logging...");
                controller.dispatch(Event::LogCurrent).await;
                pb.finish_and_clear();
                fail_on_error(&controller)?;
            }

            let state = controller.state();
            let shown = if state.logged { state.history.first() } else { state.record.as_ref() };
            let Some(record) = shown else {
                bail!("解析結果がありません");
            };

            if json {
                println!("{}", serde_json::to_string_pretty(record)?);
            } else {
                print!("{}", render_record(record));
                if let Some(toast) = &state.toast {
                    println!("\n✔ {}", toast);
                }
            }
        }

        Commands::History { limit, json, show } => {
            let store = HistoryStore::new(FileSlot::new(config.history_path()?));
            let history = store.load();

            if let Some(number) = show {
                let record = number
                    .checked_sub(1)
                    .and_then(|i| history.get(i))
                    .with_context(|| format!("履歴 #{} はありません（全{}件）", number, history.len()))?;
                if json {
                    println!("{}", serde_json::to_string_pretty(record)?);
                } else {
                    print!("{}", render_record(record));
                }
            } else if json {
                let limited: Vec<&NutritionRecord> =
                    history.iter().take(limit.unwrap_or(history.len())).collect();
                println!("{}", serde_json::to_string_pretty(&limited)?);
            } else {
                println!("📋 Meal History\n");
                print!("{}", render_history(&history, limit));
            }
        }

        Commands::Config { show, set_analysis_url, set_log_url, set_timeout } => {
            let mut config = config;
            let mut changed = false;

            if let Some(url) = set_analysis_url {
                config.analysis_url = Some(url);
                changed = true;
                println!("✔ 解析WebhookのURLを設定しました");
            }
            if let Some(url) = set_log_url {
                config.log_url = Some(url);
                changed = true;
                println!("✔ 記録WebhookのURLを設定しました");
            }
            if let Some(seconds) = set_timeout {
                config.timeout_seconds = seconds;
                changed = true;
                println!("✔ タイムアウトを{}秒に設定しました", seconds);
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定: {}", Config::config_path()?.display());
                println!("  解析Webhook: {}", describe_url(config.analysis_url()));
                println!("  記録Webhook: {}", describe_url(config.log_url()));
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  カメラ: {} ({})", config.camera_command, config.camera_device.display());
                println!("  履歴: {}", config.history_path()?.display());
            }
        }
    }

    Ok(())
}

/// 対話モード。画面ごとにメニューを出してイベントを発行する
async fn run_session<S: SlotStorage>(mut controller: Controller<S>) -> anyhow::Result<()> {
    loop {
        show_notices(&mut controller).await;

        match controller.state().screen {
            Screen::Selector => {
                let has_history = controller.state().has_history();
                let mut items = vec!["Take a Photo", "Upload Image", "Log with Text Only"];
                if has_history {
                    items.push("View History");
                }
                items.push("Quit");

                let choice = Select::new()
                    .with_prompt("How would you like to log your meal?")
                    .items(&items)
                    .default(0)
                    .interact()?;

                match items[choice] {
                    "Take a Photo" => {
                        controller.dispatch(Event::OpenCamera).await;
                    }
                    "Upload Image" => {
                        let path: String = Input::new().with_prompt("Image file").interact_text()?;
                        controller.upload(&PathBuf::from(path.trim())).await;
                    }
                    "Log with Text Only" => {
                        controller.dispatch(Event::ChooseTextOnly).await;
                    }
                    "View History" => {
                        controller.dispatch(Event::OpenHistory).await;
                    }
                    _ => break,
                }
            }

            Screen::Capture => {
                let choice = Select::new()
                    .with_prompt("Camera is ready")
                    .items(&["Capture", "Back"])
                    .default(0)
                    .interact()?;
                if choice == 0 {
                    controller.take_photo().await;
                } else {
                    controller.dispatch(Event::Back).await;
                }
            }

            Screen::Form => {
                let state = controller.state();
                if let Some(image) = &state.image {
                    println!("📷 Photo attached ({} KB)", image.approx_len() / 1024);
                }

                let current = MealType::ALL
                    .iter()
                    .position(|m| *m == state.meal_type)
                    .unwrap_or(1);
                let meal_index = Select::new()
                    .with_prompt("Meal type")
                    .items(&MealType::ALL)
                    .default(current)
                    .interact()?;
                controller.dispatch(Event::SetMealType(MealType::ALL[meal_index])).await;

                let notes: String = Input::new()
                    .with_prompt("Notes (dish, portion, ingredients)")
                    .with_initial_text(controller.state().notes.clone())
                    .allow_empty(true)
                    .interact_text()?;
                controller.dispatch(Event::SetNotes(notes)).await;

                let choice = Select::new()
                    .items(&["Analyze Meal", "Back"])
                    .default(0)
                    .interact()?;
                if choice == 0 {
                    let pb = spinner("Analyzing your meal...");
                    controller.dispatch(Event::SubmitAnalysis).await;
                    pb.finish_and_clear();
                } else {
                    controller.dispatch(Event::Back).await;
                }
            }

            Screen::Result => {
                let state = controller.state();
                if let Some(record) = &state.record {
                    println!("\n{}", render_record(record));
                }
                let log_label = if state.logged { "✓ Logged" } else { "Log Meal to Sheet" };
                let can_log = state.can_log();

                let choice = Select::new()
                    .items(&[log_label, "Analyze Another Meal"])
                    .default(if can_log { 0 } else { 1 })
                    .interact()?;
                if choice == 0 && can_log {
                    let pb = spinner("Logging...");
                    controller.dispatch(Event::LogCurrent).await;
                    pb.finish_and_clear();
                } else if choice == 1 {
                    controller.dispatch(Event::Reset).await;
                }
            }

            Screen::History { selected: None } => {
                let history = &controller.state().history;
                let mut items: Vec<String> = history
                    .iter()
                    .enumerate()
                    .map(|(i, r)| render_history_line(i, r))
                    .collect();
                items.push("Back".to_string());

                let choice = Select::new()
                    .with_prompt("Meal History")
                    .items(&items)
                    .default(0)
                    .interact()?;
                if choice + 1 == items.len() {
                    controller.dispatch(Event::Back).await;
                } else {
                    controller.dispatch(Event::SelectHistory(choice)).await;
                }
            }

            Screen::History { selected: Some(_) } => {
                if let Some(record) = controller.state().selected_history() {
                    println!("\nLog Details\n\n{}", render_record(record));
                }
                Select::new().items(&["Back"]).default(0).interact()?;
                controller.dispatch(Event::Back).await;
            }
        }
    }

    Ok(())
}

/// エラー・トーストを表示して消す
async fn show_notices<S: SlotStorage>(controller: &mut Controller<S>) {
    if let Some(error) = controller.state().error.clone() {
        eprintln!("⚠ {}", error);
        controller.dispatch(Event::DismissError).await;
    }
    if let Some(toast) = controller.state().toast.clone() {
        println!("✔ {}", toast);
        controller.dispatch(Event::DismissToast).await;
    }
}

fn fail_on_error<S: SlotStorage>(controller: &Controller<S>) -> anyhow::Result<()> {
    match &controller.state().error {
        Some(error) => bail!("{}", error),
        None => Ok(()),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn describe_url(url: meal_log::error::Result<String>) -> String {
    url.unwrap_or_else(|_| "未設定".to_string())
}
