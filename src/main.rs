fn main() {
    if let Err(err) = csv_salvage::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
