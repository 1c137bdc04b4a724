use wctree::presentation::cli::{init_logging, CliApp};

#[tokio::main]
async fn main() {
    let app = CliApp::new();
    let invocation = app.parse();
    init_logging(invocation.globals.verbose);

    let code = app.run(invocation).await;
    std::process::exit(code);
}
