use std::sync::Arc;

use anyhow::Result;

use fs_stack::{FileSystem, MemoryFS, MountFS, OsFS, ReadOnlyFS, UnionFS};

fn main() -> Result<()> {
    let tmp = std::env::temp_dir();
    println!("Temp dir: {}", tmp.display());

    // a "system" directory on disk that must never be modified
    let base_root = tmp.join("fs_stack_demo/base");
    let base = Arc::new(OsFS::new(&base_root)?);
    let seed = FileSystem::new(base.clone());
    seed.mkdir("/etc", true)?;
    seed.writelines("/etc/hostname", ["host1"])?;

    // writable memory overlay on top of the read-only base
    let mut overlay = UnionFS::new();
    overlay.add_branch(Arc::new(MemoryFS::new()), "mem", Some(0), true)?;
    overlay.add_branch(Arc::new(ReadOnlyFS::new(base)), "base", Some(1), false)?;

    // mount the overlay at /, plus a separate scratch area
    let mut mounts = MountFS::new();
    mounts.mount_fs("/", Arc::new(overlay))?;
    mounts.mount_fs("/scratch", Arc::new(MemoryFS::new()))?;
    let fs = FileSystem::new(Arc::new(mounts));

    // reads fall through the overlay to the base
    assert_eq!(fs.read_one_line("/etc/hostname")?, "host1");

    // writes shadow the base; the file on disk stays untouched
    fs.writelines("/etc/hostname", ["host2"])?;
    assert_eq!(fs.read_one_line("/etc/hostname")?, "host2");
    assert_eq!(seed.read_one_line("/etc/hostname")?, "host1");
    println!(
        "overlay sees {:?}, disk still has {:?}",
        fs.read_one_line("/etc/hostname")?,
        seed.read_one_line("/etc/hostname")?
    );

    // the scratch mount is its own backend; the overlay never sees it
    fs.write_all("/scratch/notes.txt", b"volatile")?;
    assert!(fs.exists("/scratch/notes.txt"));
    assert!(!seed.exists("/scratch"));

    // the mount table lists both real entries and mount children
    let root_entries = fs.listdir("/")?;
    println!("/: {:?}", root_entries);
    assert!(root_entries.contains(&"etc".to_string()));
    assert!(root_entries.contains(&"scratch".to_string()));

    Ok(())
}
