fn main() {
    if let Err(err) = sheet_append::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
