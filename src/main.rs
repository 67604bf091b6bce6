fn main() -> std::process::ExitCode {
    partsdesk_lib::run()
}
