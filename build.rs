use std::env;
use std::path::PathBuf;

// 为 C 接口生成头文件，输出到 OUT_DIR/mathtext_render.h
fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        return;
    };
    let header = PathBuf::from(out_dir).join("mathtext_render.h");

    match cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("MATHTEXT_RENDER_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(header);
        }
        // 头文件只是附带产物，生成失败不影响库本身
        Err(err) => println!("cargo:warning=cbindgen 生成头文件失败: {err}"),
    }
}
