use std::time::Duration;

fn main() {
    env_logger::init();

    let mut s = httpstub::Server::start();
    s.with_default_content_type("application/json");

    s.path("/user/*/name").with_body(r#"{"name":"Alice"}"#);
    s.path("/").with_body(r#"{"hello":"world"}"#);

    println!("Listening at {}", s.url());

    loop {
        std::thread::sleep(Duration::from_secs(1))
    }
}
