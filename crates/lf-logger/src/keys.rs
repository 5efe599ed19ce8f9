//! Well-known structured log field names.

pub const SERVICE_NAME: &str = "service.name";

pub const REQUEST_ID: &str = "request_id";
pub const HANDLER: &str = "handler";

pub const GRPC_SERVICE: &str = "grpc.service";
pub const GRPC_METHOD: &str = "grpc.method";
pub const GRPC_REQUEST_BODY: &str = "grpc.request.body";
pub const GRPC_REQUEST_START_TIME: &str = "grpc.request.start_time";
pub const GRPC_REQUEST_DEADLINE: &str = "grpc.request.deadline";
pub const GRPC_REQUEST_RESPONSE: &str = "grpc.request.response";

pub const WATCHER_NAME: &str = "watcher.name";
pub const WATCHER_PARAMS: &str = "watcher.params";

pub const RMQ_CONNECTION_NAME: &str = "rmq.connection_name";
pub const RMQ_SERVER_NAME: &str = "rmq.server_name";
pub const RMQ_EXCHANGE: &str = "rmq.exchange";
pub const RMQ_ROUTING_KEY: &str = "rmq.routing_key";
pub const RMQ_MSG_BODY: &str = "rmq.msg.body";
pub const RMQ_HANDLER_START_TIME: &str = "rmq.handler.start_time";
pub const RMQ_HANDLER_PANIC_MSG: &str = "rmq.handler.panic_msg";

/// Keys the JSONL layer writes itself; event fields never overwrite them.
pub const RESERVED: &[&str] = &["ts", "level", "target", "message", SERVICE_NAME];
