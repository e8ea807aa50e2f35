//! Pageflow CLI (for testing purposes only)
//! The main interface is through WASM bindings.

fn main() {
    println!("Pageflow Story Pagination Core");
    println!("==============================");
    println!();
    println!("This is a library crate. To use it:");
    println!();
    println!("  1. Build WASM: wasm-pack build --target web");
    println!("  2. Wire the surface callbacks from your editor host");
    println!();
    println!("For testing the core library:");
    println!("  cargo test");
}
