mod chat_repository;
mod comment_repository;
mod like_repository;
mod post_repository;
mod price_repository;
mod product_repository;
mod scheme_repository;
mod user_repository;

pub use chat_repository::ChatRepository;
pub use comment_repository::CommentRepository;
pub use like_repository::LikeRepository;
pub use post_repository::PostRepository;
pub use price_repository::PriceRepository;
pub use product_repository::ProductRepository;
pub use scheme_repository::SchemeRepository;
pub use user_repository::UserRepository;
