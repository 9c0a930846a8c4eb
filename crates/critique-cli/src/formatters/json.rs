use critique_core::response::Response;

pub fn print(resp: &Response) {
    let json = serde_json::to_string_pretty(resp).expect("failed to serialize");
    println!("{}", json);
}
