use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

use tree_to_pdf::cli::{run, Cli, Commands};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let msg = format!("{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = Cli {
        command: Commands::Compile {
            folder: std::path::PathBuf::from("definitely-not-a-folder"),
            config: None,
            output: None,
        },
    };
    let result = run(cli).await;
    assert!(result.is_err(), "compiling a missing folder must fail");

    let events = events.lock().unwrap();
    assert!(
        events.iter().any(|e| e.contains("trace_initialised")),
        "Expected a trace_initialised event, got: {:?}",
        *events
    );
    assert!(
        events.iter().any(|e| e.contains("Compilation failed")),
        "Expected the failure to be traced"
    );
}

#[tokio::test]
async fn successful_run_traces_the_report() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(EventCollector {
        events: events.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let project = tempfile::tempdir().unwrap();
    std::fs::write(project.path().join("app.ts"), "export const x = 1;\n").unwrap();

    let cli = Cli {
        command: Commands::Compile {
            folder: project.path().to_path_buf(),
            config: None,
            output: None,
        },
    };
    run(cli).await.expect("compile should succeed");

    let events = events.lock().unwrap();
    assert!(events.iter().any(|e| e.contains("Compilation complete")));
}
