use std::sync::Arc;

use anyhow::Result;
use loanboard::api::{HttpApi, MetricsApi};
use loanboard::config::Config;
use loanboard::dashboard::{load_dashboard, HistorySession, RefreshSignal};
use loanboard::logging::{log, obj, v_num, v_str, Domain, Level};
use loanboard::render::{ChartSlot, TextCanvasFactory};
use loanboard::view::{DashboardState, DashboardView, HistoryView, HISTORY_COLUMNS};

fn print_dashboard(view: &DashboardView) -> Result<()> {
    println!("DECISION TREE  (model version {})", view.model_version);
    println!();
    for card in view.cards.iter().chain(view.summary.iter()) {
        println!("  {:<18} {:>9}  [{}]", card.label, card.display, card.tier.as_str());
    }
    println!("  {:<18} {:>9}", "Optimal threshold", view.optimal_threshold);
    println!();
    println!("Confusion matrix");
    for (label, value) in view.confusion.cells() {
        println!("  {:<3} {}", label, value);
    }
    println!();

    let mut roc = ChartSlot::new("roc", TextCanvasFactory::default());
    let mut pr = ChartSlot::new("precision_recall", TextCanvasFactory::default());
    if let Some(out) = roc.bind(&view.roc)?.output() {
        println!("{}", out);
    }
    if let Some(out) = pr.bind(&view.precision_recall)?.output() {
        println!("{}", out);
    }
    Ok(())
}

fn print_history(view: &HistoryView) {
    let header: Vec<&str> = HISTORY_COLUMNS.iter().map(|(_, label)| *label).collect();
    println!("{:<22} {}", "Date", header.join(" | "));
    for row in &view.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|c| format!("{}({})", c.display, c.tier.as_str()))
            .collect();
        println!("{:<22} {}", row.date, cells.join(" | "));
    }
    if let Some(msg) = view.empty_message.as_ref().or(view.error.as_ref()) {
        println!("{}", msg);
    }
    println!("{}", view.page_label);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("base_url", v_str(&cfg.base_url)),
            ("page_size", v_num(cfg.page_size as f64)),
        ]),
    );
    let api: Arc<dyn MetricsApi> = Arc::new(HttpApi::new(&cfg)?);

    match load_dashboard(api.as_ref()).await {
        DashboardState::Ready(view) => print_dashboard(&view)?,
        DashboardState::Empty { message } => println!("Loading metrics... ({})", message),
    }

    let page: u32 = std::env::var("PAGE").ok().and_then(|v| v.parse().ok()).unwrap_or(1);
    let signal = RefreshSignal::new();
    let mut history = HistorySession::new(api, cfg.page_size, &signal);
    if page > 1 {
        // learn the page count before jumping
        history.go_to_page(1).await;
    }
    print_history(history.go_to_page(page).await);
    Ok(())
}
