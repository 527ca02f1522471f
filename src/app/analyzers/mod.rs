pub mod publishing_page;
