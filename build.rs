use rustc_version::version;

fn main() {
    let rustc = match version() {
        Ok(v) => v.to_string(),
        Err(_) => "unknown".to_owned(),
    };
    println!("cargo:rustc-env=RUSTC_VERSION={rustc}");
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(target_os = "windows")]
    {
        let mut res = winresource::WindowsResource::new();
        res.set("FileVersion", env!("CARGO_PKG_VERSION"));
        if let Err(e) = res.compile() {
            println!("cargo:warning=unable to embed Windows resources: {e}");
        }
    }
}
