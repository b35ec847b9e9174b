use chrono::{DateTime, Utc};
use color_eyre::eyre::{eyre, Result, WrapErr};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use vetclinic_client::{
    calendar::{CalendarController, EventDrop},
    config::ClientConfig,
    gateway::{AppointmentService, HttpGateway, WaitingRoomService},
    waiting_room::WaitingRoomController,
};

const USAGE: &str =
    "usage: agenda [START END] | agenda move ID START [END] | agenda queue [--watch]";

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .wrap_err_with(|| format!("Invalid instant: {}", value))?
        .with_timezone(&Utc))
}

fn print_agenda(calendar: &CalendarController<AppointmentService>) {
    if let Some(message) = calendar.blocking_error() {
        eprintln!("{}", message);
        return;
    }
    let events = calendar.events();
    if events.is_empty() {
        println!("No appointments in this range.");
    }
    for event in events {
        println!(
            "{:>6}  {} - {}  {}{}",
            event.id,
            event.start.format("%Y-%m-%d %H:%M"),
            event.end.format("%H:%M"),
            event.title,
            event
                .extended_props
                .pet_name
                .map(|pet| format!(" ({})", pet))
                .unwrap_or_default(),
        );
    }
}

fn print_queue(queue: &WaitingRoomController<WaitingRoomService>) {
    let state = queue.entries();
    if let Some(message) = state.error {
        eprintln!("{}", message);
        return;
    }
    let stats = queue.stats();
    println!(
        "Waiting: {}  In consultation: {}  Today: {}",
        stats.waiting, stats.in_consultation, stats.today_total
    );
    for (entry, waited) in queue.rows(Utc::now()) {
        println!(
            "{:>6}  {:<15}  {:<9}  {:>7}  {} ({})",
            entry.id.unwrap_or_default(),
            entry.status.display_name(),
            entry.priority.display_name(),
            waited,
            entry.pet_name.unwrap_or_default(),
            entry.client_name.unwrap_or_default(),
        );
    }
}

async fn watch_queue(config: &ClientConfig) -> Result<()> {
    let queue = WaitingRoomController::new(WaitingRoomService::new(HttpGateway::new(
        config.api_url.clone(),
    )));
    queue.refresh().await;
    print_queue(&queue);

    let (shutdown, signal) = tokio::sync::watch::channel(false);
    let poller = queue.spawn_polling(config.waiting_room_refresh, signal);
    let mut updates = queue.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if !updates.borrow_and_update().loading {
                    print_queue(&queue);
                }
            }
        }
    }
    shutdown.send_replace(true);
    poller.await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    dotenv().ok();

    let config = ClientConfig::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Using clinic service at {}", config.api_url);
    let service = AppointmentService::new(HttpGateway::new(config.api_url.clone()));
    let mut calendar = CalendarController::new(service, config.reschedule_strategy);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            calendar.mount(Utc::now()).await;
            print_agenda(&calendar);
        }
        [start, end] => {
            calendar
                .dates_set_str(start, end)
                .await
                .wrap_err("Invalid range")?;
            print_agenda(&calendar);
        }
        [command, id, start, rest @ ..] if command == "move" && rest.len() <= 1 => {
            let start = parse_instant(start)?;
            let end = rest.first().map(|end| parse_instant(end)).transpose()?;
            calendar.mount(start).await;
            calendar
                .event_drop(EventDrop {
                    event_id: id.clone(),
                    start: Some(start),
                    end,
                })
                .await;
            if let Some(notification) = calendar.notification() {
                println!("{}", notification.message);
            }
        }
        [command] if command == "queue" => {
            let queue = WaitingRoomController::new(WaitingRoomService::new(HttpGateway::new(
                config.api_url.clone(),
            )));
            queue.refresh().await;
            print_queue(&queue);
        }
        [command, flag] if command == "queue" && flag == "--watch" => {
            watch_queue(&config).await?;
        }
        _ => return Err(eyre!(USAGE)),
    }

    Ok(())
}
