pub mod cluster_collection;
