fn main() {
    cookie_master::cli::run();
}
