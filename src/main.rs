fn main() {
    jarcat::cli::run();
}
