use log::debug;
use log::info;
use std::process::Command;
use anyhow::bail;

pub fn check_bwa() -> anyhow::Result<()> {
    debug!("Checking for bwa");
    if let Ok(_output) = Command::new("bwa").output() {
        info!("Found bwa");
        Ok(())
    } else {
        bail!("bwa is either not installed or not in PATH")
    }
}

pub fn check_samtools() -> anyhow::Result<()> {
    debug!("Checking for samtools");
    if let Ok(_output) = Command::new("samtools").output() {
        info!("Found samtools");
        Ok(())
    } else {
        bail!("samtools is either not installed or not in PATH")
    }
}

pub fn check_blastn() -> anyhow::Result<()> {
    debug!("Checking for blastn");
    if let Ok(_output) = Command::new("blastn").arg("-version").output() {
        info!("Found blastn");
        Ok(())
    } else {
        bail!("blastn is either not installed or not in PATH")
    }
}

pub fn check_make() -> anyhow::Result<()> {
    debug!("Checking for make");
    if let Ok(_output) = Command::new("make").arg("--version").output() {
        info!("Found make");
        Ok(())
    } else {
        bail!("make is either not installed or not in PATH")
    }
}

pub fn check_makeblastdb() -> anyhow::Result<()> {
    debug!("Checking for makeblastdb");
    if let Ok(_output) = Command::new("makeblastdb").arg("-version").output() {
        info!("Found makeblastdb");
        Ok(())
    } else {
        bail!("makeblastdb is either not installed or not in PATH")
    }
}
