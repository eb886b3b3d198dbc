use crate::global_variables::*;

pub struct PostResult {
    pub name: String,
    pub value: Float,
}

impl PostResult {
    pub fn new(name: String, value: Float) -> Self {
        Self { name, value }
    }
}
