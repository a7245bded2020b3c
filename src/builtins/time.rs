use chrono::Local;

pub fn now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S %:z").to_string()
}
