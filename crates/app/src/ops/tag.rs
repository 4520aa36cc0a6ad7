use clap::Args;

use common::encoding::get_tag;

/// Print the tag of a tagged string, or nothing if it has none
#[derive(Args, Debug, Clone)]
pub struct Tag {
    pub value: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Tag {
    type Error = std::convert::Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(get_tag(&self.value).to_string())
    }
}
