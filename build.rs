use time::OffsetDateTime;

/// Build instant, pinned by `SOURCE_DATE_EPOCH` for reproducible builds.
fn build_instant() -> OffsetDateTime {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

fn stamp(now: OffsetDateTime, format: &str) -> String {
    time::format_description::parse(format)
        .ok()
        .and_then(|fmt| now.format(&fmt).ok())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let now = build_instant();
    let date = stamp(now, "[month repr:short] [day padding:space] [year]");
    let time = stamp(now, "[hour]:[minute]:[second]");

    // Package version and profile, unless the packager names the build.
    let build_id = std::env::var("ACL_SJSON_BUILD_ID").unwrap_or_else(|_| {
        let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
        let profile = std::env::var("PROFILE").unwrap_or_default();
        format!("{version}-{profile}")
    });

    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=ACL_SJSON_BUILD_ID");
    println!("cargo:rustc-env=ACL_SJSON_BUILD_DATE={date}");
    println!("cargo:rustc-env=ACL_SJSON_BUILD_TIME={time}");
    println!("cargo:rustc-env=ACL_SJSON_BUILD_ID={build_id}");
}
