//! Domain -> wire conversions.

use contentoire_core::domain::{CalendarMonth, Post, Provider, SearchKeyword, User};
use contentoire_infra::FeedSnapshot;
use contentoire_shared::dto::{
    CalendarDayResponse, CalendarResponse, DayIndicatorsResponse, PostFeedFrame, PostResponse,
    ProviderResponse, SearchKeywordResponse, SocialMediaResponse, UserResponse,
};

pub fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        image_url: post.image_url,
        source_url: post.source_url,
        status: post.status.to_string(),
        suggested_time: post.suggested_time,
        scheduled_time: post.scheduled_time,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn feed_frame(snapshot: FeedSnapshot) -> PostFeedFrame {
    PostFeedFrame {
        status: snapshot.status.to_string(),
        posts: snapshot.posts.into_iter().map(post_response).collect(),
        loading: snapshot.loading,
        refreshing: snapshot.refreshing,
        error: snapshot.error,
    }
}

pub fn calendar_response(calendar: CalendarMonth, time_zone: String) -> CalendarResponse {
    CalendarResponse {
        year: calendar.year,
        month: calendar.month,
        time_zone,
        days: calendar
            .days
            .into_iter()
            .map(|day| CalendarDayResponse {
                date: day.date,
                in_current_month: day.in_current_month,
                indicators: DayIndicatorsResponse {
                    waiting: day.indicators.waiting,
                    scheduled: day.indicators.scheduled,
                    posted: day.indicators.posted,
                },
                posts: day.posts.into_iter().map(post_response).collect(),
            })
            .collect(),
    }
}

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        full_name: user.full_name(),
        roles: user.roles.clone(),
        enabled_media: user.enabled_media.clone(),
        photo_url: user.photo_url.clone(),
        created_at: user.created_at,
    }
}

pub fn provider_response(provider: Provider) -> ProviderResponse {
    ProviderResponse {
        id: provider.id,
        kind: provider.kind.to_string(),
        code: provider.code,
        title: provider.title,
        logo: provider.logo,
        enabled: provider.enabled,
        api_key: provider.api_key,
        sources: provider.sources,
        created_at: provider.created_at,
        updated_at: provider.updated_at,
    }
}

pub fn keyword_response(keyword: SearchKeyword) -> SearchKeywordResponse {
    SearchKeywordResponse {
        id: keyword.id,
        keyword: keyword.keyword,
        region: keyword.region,
        language: keyword.language,
        category: keyword.category,
        sub_category: keyword.sub_category,
        description: keyword.description,
        enabled: keyword.enabled,
        created_at: keyword.created_at,
        updated_at: keyword.updated_at,
    }
}

pub fn social_media_response(provider: Provider) -> SocialMediaResponse {
    SocialMediaResponse {
        id: provider.code,
        title: provider.title,
        logo: provider.logo,
    }
}
