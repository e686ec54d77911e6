use std::env;
use std::path::Path;

// 模板与静态资源由 rust-embed 在编译期嵌入
const EMBEDDED_DIRS: [&str; 2] = ["templates", "static"];

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();

    for dir in EMBEDDED_DIRS {
        println!("cargo:rerun-if-changed={dir}");

        if !Path::new(&manifest_dir).join(dir).is_dir() {
            panic!("{dir}/ directory not found, it is embedded into the binary at compile time");
        }
    }
}
