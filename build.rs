// Copies the static site into `dist/` so it can be deployed as-is once
// `wasm-pack` has written `static/pkg`.
use std::path::Path;

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        if let Err(err) = std::fs::remove_dir_all(out_dir) {
            println!("cargo:warning=could not clear dist/: {err}");
            return;
        }
    }

    let mut options = CopyOptions::new();
    options.content_only = true;
    if let Err(err) = std::fs::create_dir_all(out_dir).map_err(|e| e.to_string()).and_then(|_| {
        copy(static_dir, out_dir, &options)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }) {
        println!("cargo:warning=could not copy static/ to dist/: {err}");
    }
}
