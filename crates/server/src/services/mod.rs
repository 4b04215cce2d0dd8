/// 业务服务层

pub mod stats_service;
