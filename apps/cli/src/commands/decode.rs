//! 离线帧解码

use ajsr04_sdk::protocol::{ASCII_FRAME_LEN, BINARY_FRAME_LEN, Framing, Reading, decode};
use anyhow::{Context, Result};
use clap::Args;

/// 解码以十六进制给出的抓取帧
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// 帧字节的十六进制表示（`ff07d0d7`、`ff 07 d0 d7`）
    #[arg(required = true)]
    pub hex: Vec<String>,

    /// 强制指定帧格式，而不是按长度推断
    #[arg(long, value_parser = parse_framing)]
    pub framing: Option<Framing>,
}

fn parse_framing(s: &str) -> Result<Framing, String> {
    match s.to_ascii_lowercase().as_str() {
        "binary" | "bin" => Ok(Framing::Binary),
        "ascii" => Ok(Framing::Ascii),
        _ => Err(format!("unknown framing '{s}' (binary, ascii)")),
    }
}

impl DecodeCommand {
    pub fn decode(&self) -> Result<(Framing, Reading)> {
        let joined: String = self.hex.concat().chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = hex::decode(&joined).with_context(|| format!("invalid hex '{joined}'"))?;

        let framing = match self.framing {
            Some(framing) => framing,
            None => match bytes.len() {
                BINARY_FRAME_LEN => Framing::Binary,
                ASCII_FRAME_LEN => Framing::Ascii,
                n => anyhow::bail!(
                    "cannot infer framing from {n} bytes (expected {BINARY_FRAME_LEN} or {ASCII_FRAME_LEN})"
                ),
            },
        };

        Ok((framing, decode(framing, &bytes)))
    }

    pub fn execute(&self) -> Result<()> {
        let (framing, reading) = self.decode()?;
        println!("framing:  {framing}");
        println!("distance: {} mm", reading.distance_mm);
        println!("status:   {}", reading.status);
        Ok(())
    }
}
