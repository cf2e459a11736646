mod cli;

fn main() {
    if let Ok(root) = std::env::var("RUM_PROJECT_ROOT") {
        if let Err(e) = std::env::set_current_dir(&root) {
            eprintln!("warning: failed to switch to project root {root}: {e}");
        }
    }
    cli::run();
}
