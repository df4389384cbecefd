use std::sync::Arc;

use flowgate_core::config::{AppConfig, LoadOptions, LogFormat};
use flowgate_core::queue::{EventSink, InMemoryEventQueue, WorkflowEvent};
use flowgate_slack::transport::NoopSocketTransport;
use flowgate_slack::trigger::{SocketTrigger, SocketTriggerV2, TriggerError};

use super::CommandResult;

enum TriggerNode {
    V1(SocketTrigger),
    V2(SocketTriggerV2),
}

impl TriggerNode {
    async fn start(&self) -> Result<(), TriggerError> {
        match self {
            Self::V1(node) => node.start().await,
            Self::V2(node) => node.start().await,
        }
    }

    async fn start_manual(&self) -> Result<Option<WorkflowEvent>, TriggerError> {
        match self {
            Self::V1(node) => node.start_manual().await,
            Self::V2(node) => node.start_manual().await,
        }
    }

    async fn close(&self) {
        match self {
            Self::V1(node) => node.close().await,
            Self::V2(node) => node.close().await,
        }
    }
}

pub fn run(node_version: u8, manual: bool) -> CommandResult {
    if !matches!(node_version, 1 | 2) {
        return CommandResult::failure(
            "run",
            "invalid_node_version",
            format!("unsupported node version `{node_version}` (expected 1 or 2)"),
            2,
        );
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("run", "config_validation", error.to_string(), 2)
        }
    };

    init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "run",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                5,
            );
        }
    };

    runtime.block_on(async move {
        let transport = Arc::new(NoopSocketTransport);
        let queue = Arc::new(InMemoryEventQueue::new());
        let sink: Arc<dyn EventSink> = queue.clone();
        let trigger_config = config.trigger.to_trigger_config();

        let node = match node_version {
            1 => TriggerNode::V1(SocketTrigger::new(
                config.slack.clone(),
                trigger_config,
                transport,
                sink,
            )),
            _ => TriggerNode::V2(SocketTriggerV2::new(
                config.slack.clone(),
                trigger_config,
                transport,
                sink,
            )),
        };

        if manual {
            return match node.start_manual().await {
                Ok(Some(event)) => CommandResult::success(
                    "run",
                    format!(
                        "captured event {} (correlation {})",
                        event.id, event.correlation_id
                    ),
                ),
                Ok(None) => {
                    CommandResult::success("run", "stream closed before a matching event arrived")
                }
                Err(error) => {
                    CommandResult::failure("run", "trigger_start", error.to_string(), 3)
                }
            };
        }

        tokio::select! {
            result = node.start() => match result {
                Ok(()) => {
                    let forwarded = queue.len().await;
                    CommandResult::success(
                        "run",
                        format!("socket stream closed; {forwarded} event(s) forwarded"),
                    )
                }
                Err(error) => CommandResult::failure("run", "trigger_start", error.to_string(), 3),
            },
            _ = tokio::signal::ctrl_c() => {
                node.close().await;
                let forwarded = queue.len().await;
                CommandResult::success(
                    "run",
                    format!("shutdown requested; {forwarded} event(s) forwarded"),
                )
            }
        }
    })
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);

    // try_init so repeated invocations in one process (tests) stay quiet.
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
