fn main() -> iced::Result {
    env_logger::init();
    fotag::app::run()
}
