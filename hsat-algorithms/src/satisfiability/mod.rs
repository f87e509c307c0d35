pub mod hybrid_walk;
