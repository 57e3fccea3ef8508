#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Page,
    Line,
    Word,
    Other,
}

impl BlockType {
    pub fn from_engine(value: &str) -> Self {
        match value {
            "PAGE" => Self::Page,
            "LINE" => Self::Line,
            "WORD" => Self::Word,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub block_type: BlockType,
    pub text: Option<String>,
}

impl TextBlock {
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            block_type: BlockType::Line,
            text: Some(text.into()),
        }
    }
}

/// One page of results from the extraction engine. `next_token` is present
/// while more pages remain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub blocks: Vec<TextBlock>,
    pub next_token: Option<String>,
}

impl ResultPage {
    pub fn line_texts(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|b| b.block_type == BlockType::Line)
            .filter_map(|b| b.text.as_deref())
            .filter(|t| !t.is_empty())
    }
}
