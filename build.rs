use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 构建信息，未提供时在运行期显示 N/A
    for key in ["SHORTENER_BUILD_DATE", "SHORTENER_BUILD_COMMIT"] {
        println!("cargo:rerun-if-env-changed={}", key);
        if let Ok(value) = env::var(key) {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }

    #[cfg(feature = "grpc")]
    {
        println!("cargo:rerun-if-changed=proto/shortener/v1/shortener.proto");
        tonic_prost_build::compile_protos("proto/shortener/v1/shortener.proto")?;
    }

    Ok(())
}
