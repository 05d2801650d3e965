#[path = "src/magic.rs"]
mod magic;
#[path = "src/staging.rs"]
mod staging;

use magic::MAGIC_STRING;
use std::{env, fs, path::PathBuf};

/// Directory holding prebuilt firmware, overriding `binary/` in the crate.
const BIN_DIR_ENV: &str = "IPXE_BIN_DIR";

enum Source {
    /// An iPXE build carrying the embedded startup script.
    Loader,
    /// A compiled device tree for one board.
    DeviceTree {
        model: &'static str,
        compatible: &'static [&'static str],
    },
}

struct Staged {
    name: &'static str,
    /// File names accepted in the firmware directory, in lookup order.
    candidates: &'static [&'static str],
    source: Source,
}

const ASSETS: &[Staged] = &[
    Staged {
        name: "undionly.kpxe",
        candidates: &["undionly.kpxe"],
        source: Source::Loader,
    },
    Staged {
        name: "ipxe.efi",
        candidates: &["ipxe.efi"],
        source: Source::Loader,
    },
    Staged {
        name: "snp.efi",
        candidates: &["snp.efi"],
        source: Source::Loader,
    },
    Staged {
        name: "ipxe.iso",
        candidates: &["ipxe.iso"],
        source: Source::Loader,
    },
    Staged {
        name: "rk3588-rock-5b.dtb",
        candidates: &[
            "rk3588-rock-5b.dtb",
            "rockchip-rk3588-rock-5b.dtb--6.8-edge.dtb",
        ],
        source: Source::DeviceTree {
            model: "Radxa ROCK 5B",
            compatible: &["radxa,rock-5b", "rockchip,rk3588"],
        },
    },
    Staged {
        name: "rk3566-orangepi-3b.dtb",
        candidates: &[
            "rk3566-orangepi-3b.dtb",
            "rockchip-rk3566-orangepi-3b.dtb--6.8-edge.dtb",
        ],
        source: Source::DeviceTree {
            model: "Xunlong Orange Pi 3B",
            compatible: &["xunlong,orangepi-3b", "rockchip,rk3566"],
        },
    },
    Staged {
        name: "meson-sm1-odroid-hc4.dtb",
        candidates: &[
            "meson-sm1-odroid-hc4.dtb",
            "amlogic-meson-sm1-odroid-hc4.dtb--6.8-edge.dtb",
        ],
        source: Source::DeviceTree {
            model: "Hardkernel ODROID-HC4",
            compatible: &["hardkernel,odroid-hc4", "amlogic,sm1"],
        },
    },
];

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let stand_ins = env::var_os("CARGO_FEATURE_STAND_INS").is_some();

    let script_path = manifest_dir.join("script").join("embed.ipxe");
    println!("cargo:rerun-if-changed={}", script_path.display());
    println!("cargo:rerun-if-env-changed={BIN_DIR_ENV}");

    let script = fs::read(&script_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", script_path.display()));
    assert_eq!(
        staging::count_occurrences(&script, MAGIC_STRING),
        1,
        "{} must contain the marker exactly once",
        script_path.display()
    );

    let bin_dir = staging::bin_dir(&manifest_dir, env::var_os(BIN_DIR_ENV).as_deref());
    if bin_dir.is_dir() {
        println!("cargo:rerun-if-changed={}", bin_dir.display());
    }

    for asset in ASSETS {
        let target = out_dir.join(asset.name);
        let bytes = match staging::load(&bin_dir, asset.name, asset.candidates, stand_ins) {
            Ok(Some(prebuilt)) => {
                println!("cargo:rerun-if-changed={}", prebuilt.path.display());
                if matches!(asset.source, Source::Loader) && !prebuilt.carries_marker() {
                    println!(
                        "cargo:warning={} does not contain the startup script marker; patching it is a no-op",
                        prebuilt.path.display()
                    );
                }
                prebuilt.bytes
            }
            Ok(None) => {
                println!(
                    "cargo:warning={} not found in {}, embedding a development stand-in",
                    asset.name,
                    bin_dir.display()
                );
                stand_in(asset, &script)
            }
            Err(e) => panic!("{e}"),
        };

        fs::write(&target, bytes)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", target.display()));
    }
}

fn stand_in(asset: &Staged, script: &[u8]) -> Vec<u8> {
    match asset.source {
        Source::Loader => {
            let mut bytes =
                format!("ipxe-bin development stand-in for {}\n", asset.name).into_bytes();
            bytes.extend_from_slice(script);
            bytes
        }
        Source::DeviceTree { model, compatible } => flat_device_tree(model, compatible),
    }
}

const FDT_MAGIC: u32 = 0xd00d_feed;
const FDT_BEGIN_NODE: u32 = 0x1;
const FDT_END_NODE: u32 = 0x2;
const FDT_PROP: u32 = 0x3;
const FDT_END: u32 = 0x9;
const FDT_VERSION: u32 = 17;
const FDT_LAST_COMP_VERSION: u32 = 16;
const FDT_HEADER_SIZE: usize = 40;
/// A single all-zero terminator entry.
const FDT_RSVMAP_SIZE: usize = 16;

/// Build a minimal version 17 flattened device tree with only a root node.
fn flat_device_tree(model: &str, compatible: &[&str]) -> Vec<u8> {
    let mut structure = Vec::new();
    let mut strings = Vec::new();

    push_be32(&mut structure, FDT_BEGIN_NODE);
    // Root node name is the empty string: one NUL padded to 4 bytes.
    structure.extend_from_slice(&[0; 4]);

    let mut compat = Vec::new();
    for entry in compatible {
        compat.extend_from_slice(entry.as_bytes());
        compat.push(0);
    }
    push_prop(&mut structure, &mut strings, "compatible", &compat);

    let mut model_value = model.as_bytes().to_vec();
    model_value.push(0);
    push_prop(&mut structure, &mut strings, "model", &model_value);

    push_be32(&mut structure, FDT_END_NODE);
    push_be32(&mut structure, FDT_END);

    let off_mem_rsvmap = FDT_HEADER_SIZE;
    let off_dt_struct = off_mem_rsvmap + FDT_RSVMAP_SIZE;
    let off_dt_strings = off_dt_struct + structure.len();
    let total_size = off_dt_strings + strings.len();

    let mut blob = Vec::with_capacity(total_size);
    push_be32(&mut blob, FDT_MAGIC);
    push_be32(&mut blob, be32_len(total_size));
    push_be32(&mut blob, be32_len(off_dt_struct));
    push_be32(&mut blob, be32_len(off_dt_strings));
    push_be32(&mut blob, be32_len(off_mem_rsvmap));
    push_be32(&mut blob, FDT_VERSION);
    push_be32(&mut blob, FDT_LAST_COMP_VERSION);
    push_be32(&mut blob, 0); // boot_cpuid_phys
    push_be32(&mut blob, be32_len(strings.len()));
    push_be32(&mut blob, be32_len(structure.len()));
    blob.resize(off_dt_struct, 0);
    blob.extend_from_slice(&structure);
    blob.extend_from_slice(&strings);
    blob
}

fn push_prop(structure: &mut Vec<u8>, strings: &mut Vec<u8>, name: &str, value: &[u8]) {
    let name_off = strings.len();
    strings.extend_from_slice(name.as_bytes());
    strings.push(0);

    push_be32(structure, FDT_PROP);
    push_be32(structure, be32_len(value.len()));
    push_be32(structure, be32_len(name_off));
    structure.extend_from_slice(value);
    while structure.len() % 4 != 0 {
        structure.push(0);
    }
}

fn push_be32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

fn be32_len(len: usize) -> u32 {
    u32::try_from(len).expect("device tree exceeds 4 GiB")
}
