fn main() {
    // Force rebuild when the embedded splash page changes
    println!("cargo:rerun-if-changed=splash");

    tauri_build::build();
}
