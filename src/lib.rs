pub mod fetch;
pub mod fragment;
pub mod markup;
pub mod passage;
pub mod render;
pub mod telegram;
pub mod transform;
