pub mod buffer;
pub mod buffer_list;
pub mod operations;
pub mod pcm;
