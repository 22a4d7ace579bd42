mod ui;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("birthday=info,birthday_surprise=info")),
        )
        .init();
    ui::run();
}
