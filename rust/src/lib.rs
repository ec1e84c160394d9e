pub mod api;
pub mod core;
pub mod scanner;

pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("scan_sound_rust"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // host platforms install their own `log` backend
    }
}
