fn main() {
    if let Err(err) = dotbatch::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
