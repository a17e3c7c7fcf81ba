// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fall back to the vendored protoc so builds don't need a system install.
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    println!("cargo:rerun-if-changed=proto/crm/v1/crm.proto");

    tonic_prost_build::configure()
        .build_client(false)
        .compile_protos(&["proto/crm/v1/crm.proto"], &["proto"])?;

    Ok(())
}
