//
// main.rs
//
// JSON-line stdio harness for the preview engine: input events in,
// render commands out. Embedders normally use the library directly and
// supply a real definition resolver; this transport wires a resolver
// that never finds anything, which is enough to exercise the wire
// format end to end.
//

use std::env;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use spyglass::config::{parse_preview_config, PreviewConfig};
use spyglass::controller::PreviewController;
use spyglass::display::DisplaySink;
use spyglass::input::InputEvent;
use spyglass::resolver::NullResolver;
use spyglass::source_reader::FileSourceReader;

fn print_usage() {
    println!(
        "spyglass {}, a peek-definition preview engine.",
        env!("CARGO_PKG_VERSION")
    );
    print!(
        r#"
Usage: spyglass [OPTIONS]

Available options:

--stdio                      Run the engine over JSON-line stdio transport
--version                    Print the version
--help                       Print this help message

Settings may be provided via the SPYGLASS_SETTINGS environment variable
as a JSON object with a "preview" section.

"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    argv.next(); // skip executable name

    let mut use_stdio = false;

    for arg in argv {
        match arg.as_str() {
            "--stdio" => use_stdio = true,
            "--version" => {
                println!("spyglass {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("Unknown argument: '{other}'"));
            }
        }
    }

    if !use_stdio {
        print_usage();
        return Ok(());
    }

    env_logger::init();

    let config = env::var("SPYGLASS_SETTINGS")
        .ok()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
        .and_then(|settings| parse_preview_config(&settings))
        .unwrap_or_default();

    run_stdio(config).await
}

async fn run_stdio(config: PreviewConfig) -> anyhow::Result<()> {
    let (sink, mut commands) = DisplaySink::new();
    let controller = PreviewController::new(
        config,
        Arc::new(NullResolver),
        Arc::new(FileSourceReader::new()),
        sink,
    );

    // Forward render commands to stdout as JSON lines
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(command) = commands.recv().await {
            match serde_json::to_string(&command) {
                Ok(mut line) => {
                    line.push('\n');
                    if stdout.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                    let _ = stdout.flush().await;
                }
                Err(err) => log::warn!("failed to serialize command: {}", err),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<InputEvent>(line) {
            Ok(event) => controller.handle_event(event).await,
            Err(err) => log::warn!("ignoring malformed input event: {}", err),
        }
    }

    drop(controller);
    writer.abort();
    Ok(())
}
