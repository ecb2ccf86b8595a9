use clap::Parser;
use ridematch::app::RideMatchApp;

fn main() {
    env_logger::init();
    let args = RideMatchApp::parse();
    if let Err(e) = args.run() {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
