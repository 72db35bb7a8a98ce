//! Notification Dispatcher and Push Delivery

pub mod dispatcher;
pub mod encryption;
pub mod push;

pub use dispatcher::{
    BroadcastReport, DeliveryOutcome, DeliveryStatus, NotificationDispatcher, SubscribeOutcome,
};
pub use push::{PushDelivery, PushError, VapidKeys, WebPushClient, WebPushConfig};
