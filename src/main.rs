use anyhow::Result;
use meterstream::logging::{get_logger, init_logging};
use meterstream::{Config, Session};
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<()> {
    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let logger = get_logger("main");
    logger.info(&format!(
        "meterstream {} starting ({:?} transport, {}:{})",
        env!("APP_VERSION"),
        config.transport.kind,
        config.transport.host,
        config.transport.port
    ));

    let mut session =
        Session::new(&config).map_err(|e| anyhow::anyhow!("Failed to create session: {}", e))?;

    let shutdown = session.shutdown_handle();
    let signal_logger = logger.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                signal_logger.info("Interrupt received, shutting down");
                shutdown.shutdown();
            }
            Err(e) => signal_logger.error(&format!("Unable to listen for Ctrl-C: {}", e)),
        }
    });

    // Echo the status line whenever it changes
    let mut snapshots = session.snapshot_stream();
    let monitor_logger = logger.clone();
    let monitor = tokio::spawn(async move {
        let mut last_message = String::new();
        let mut last_connection = None;
        while let Some(snapshot) = snapshots.next().await {
            if last_connection != Some(snapshot.connection) {
                monitor_logger.debug(&format!("Connection {:?}", snapshot.connection));
                last_connection = Some(snapshot.connection);
            }
            if snapshot.message != last_message {
                monitor_logger.info(&format!(
                    "[{} {}] {}",
                    snapshot.date, snapshot.time, snapshot.message
                ));
                last_message.clone_from(&snapshot.message);
            }
        }
    });

    session.run().await;
    monitor.abort();

    logger.info(&format!(
        "Shutdown complete after {} connect attempt(s)",
        session.attempts()
    ));
    meterstream::logging::flush();
    Ok(())
}
