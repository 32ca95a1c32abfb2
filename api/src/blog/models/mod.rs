pub mod blog_comment;
