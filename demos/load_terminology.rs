//! Load a terminology file and page through it
//!
//! Usage: cargo run --example load_terminology -- [file] [version] [filter]

use terminology_viewer::{Classification, Config, Event, RowView, ViewerSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let file = args
        .next()
        .unwrap_or_else(|| "admit_source.csv_0_0_0.csv.gz".to_string());
    let version = args.next();
    let filter = args.next().unwrap_or_default();

    let session = ViewerSession::new(Config::default())?;

    let mut events = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::LoadStarted { generation, locator } => {
                    println!("[{generation}] loading {locator}");
                }
                Event::FallbackStarted { generation, reason } => {
                    println!("[{generation}] falling back to a partial read: {reason}");
                }
                Event::Superseded { generation, current } => {
                    println!("[{generation}] discarded, request {current} is newer");
                }
                _ => {}
            }
        }
    });

    if let Some(version) = version {
        session.switch_version(&version).await?;
    }
    session.open(&file).await?;

    let Some(displayed) = session.current().await else {
        println!("nothing loaded");
        return Ok(());
    };

    let report = &displayed.report;
    let outcome = match (&report.state.classification, &report.outcome) {
        (Classification::Failed { reason }, _) => {
            eprintln!("Error loading file: {reason}");
            return Ok(());
        }
        (_, Some(outcome)) => outcome,
        (_, None) => return Ok(()),
    };

    if report.is_partial() {
        println!(
            "Showing partial data: {} rows ({} stage)",
            outcome.rows.len(),
            report.state.stage
        );
    }

    let view = RowView::new(&outcome.rows, &filter);
    let page = view.page(1, 100);
    println!("{}", outcome.placeholder_headers().join(" | "));
    for row in &page.rows {
        println!("{}", row.join(" | "));
    }
    println!(
        "Page {} of {} ({} of {} rows match)",
        page.number,
        page.total_pages,
        view.len(),
        outcome.rows.len()
    );

    Ok(())
}
