//! Command Line Interface
//!
//! 朗读命令行文本，或按商品 JSON 生成旁白

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use crate::domain::ProductNarration;

/// Narrator - 文本转语音旁白
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// 要朗读的文本（多个参数以空格连接）
    #[arg(required_unless_present = "product", conflicts_with = "product")]
    pub text: Vec<String>,

    /// 商品信息 JSON 文件，按商品详情生成旁白
    #[arg(long, value_name = "PATH")]
    pub product: Option<PathBuf>,
}

impl Args {
    /// 得到朗读文本
    pub async fn narration_text(&self) -> anyhow::Result<String> {
        match &self.product {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read product file {}", path.display()))?;
                let product: ProductNarration =
                    serde_json::from_str(&raw).context("Invalid product JSON")?;
                Ok(product.format())
            }
            None => Ok(self.text.join(" ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_text_arguments_are_joined() {
        let args = Args::try_parse_from(["narrator", "Hello", "there"]).unwrap();
        assert_eq!(args.narration_text().await.unwrap(), "Hello there");
    }

    #[test]
    fn test_text_or_product_is_required() {
        assert!(Args::try_parse_from(["narrator"]).is_err());
    }

    #[test]
    fn test_text_and_product_conflict() {
        assert!(Args::try_parse_from(["narrator", "Hello", "--product", "p.json"]).is_err());
    }

    #[tokio::test]
    async fn test_product_file_is_formatted() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"name": "Lamp", "description": "A desk lamp.", "price": 20, "inStock": true}}"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let args = Args::try_parse_from(["narrator", "--product", path.as_str()]).unwrap();
        let text = args.narration_text().await.unwrap();
        assert!(text.starts_with("Lamp. A desk lamp. This product costs $20."));
        assert!(text.contains("currently in stock"));
    }
}
