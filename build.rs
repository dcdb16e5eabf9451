fn main() {
    // Wire the ESP-IDF build environment only for device builds; host
    // builds (tests, bench simulation) need no toolchain glue.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
