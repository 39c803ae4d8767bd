use strum_macros::{Display, EnumIter, IntoStaticStr};

/// How a resource type accepts stack-wide tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStyle {
    /// `Tags: [{Key, Value}]`.
    KeyValueList,
    /// `Tags: [{Key, Value, PropagateAtLaunch}]`, auto scaling groups only.
    Propagating,
    Untagged,
}

/// Resource types the synthesizer knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr)]
pub enum ResourceKind {
    #[strum(serialize = "AWS::EC2::VPC")]
    Vpc,
    #[strum(serialize = "AWS::EC2::InternetGateway")]
    InternetGateway,
    #[strum(serialize = "AWS::EC2::VPCGatewayAttachment")]
    GatewayAttachment,
    #[strum(serialize = "AWS::EC2::Subnet")]
    Subnet,
    #[strum(serialize = "AWS::EC2::RouteTable")]
    RouteTable,
    #[strum(serialize = "AWS::EC2::Route")]
    Route,
    #[strum(serialize = "AWS::EC2::SubnetRouteTableAssociation")]
    SubnetRouteTableAssociation,
    #[strum(serialize = "AWS::EC2::EIP")]
    ElasticIp,
    #[strum(serialize = "AWS::EC2::NatGateway")]
    NatGateway,
    #[strum(serialize = "AWS::EC2::SecurityGroup")]
    SecurityGroup,
    #[strum(serialize = "AWS::EC2::SecurityGroupIngress")]
    SecurityGroupIngress,
    #[strum(serialize = "AWS::EC2::LaunchTemplate")]
    LaunchTemplate,
    #[strum(serialize = "AWS::SecretsManager::Secret")]
    Secret,
    #[strum(serialize = "AWS::Logs::LogGroup")]
    LogGroup,
    #[strum(serialize = "AWS::IAM::Role")]
    Role,
    #[strum(serialize = "AWS::IAM::InstanceProfile")]
    InstanceProfile,
    #[strum(serialize = "AWS::AutoScaling::AutoScalingGroup")]
    AutoScalingGroup,
    #[strum(serialize = "AWS::ECS::Cluster")]
    Cluster,
    #[strum(serialize = "AWS::ECS::CapacityProvider")]
    CapacityProvider,
    #[strum(serialize = "AWS::ECS::ClusterCapacityProviderAssociations")]
    CapacityProviderAssociation,
    #[strum(serialize = "AWS::ECS::TaskDefinition")]
    TaskDefinition,
    #[strum(serialize = "AWS::ECS::Service")]
    Service,
    #[strum(serialize = "AWS::ElasticLoadBalancingV2::LoadBalancer")]
    LoadBalancer,
    #[strum(serialize = "AWS::ElasticLoadBalancingV2::TargetGroup")]
    TargetGroup,
    #[strum(serialize = "AWS::ElasticLoadBalancingV2::Listener")]
    Listener,
    #[strum(serialize = "AWS::ApplicationAutoScaling::ScalableTarget")]
    ScalableTarget,
    #[strum(serialize = "AWS::ApplicationAutoScaling::ScalingPolicy")]
    ScalingPolicy,
}

impl ResourceKind {
    /// Fully qualified type name as written into the template.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        self.into()
    }

    /// Attribute names `Fn::GetAtt` may read from this type.
    #[must_use]
    pub const fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::Vpc => &["CidrBlock", "DefaultSecurityGroup", "VpcId"],
            Self::InternetGateway => &["InternetGatewayId"],
            Self::Subnet => &["AvailabilityZone", "SubnetId", "VpcId"],
            Self::RouteTable => &["RouteTableId"],
            Self::SubnetRouteTableAssociation
            | Self::SecurityGroupIngress
            | Self::Secret
            | Self::ScalableTarget => &["Id"],
            Self::ElasticIp => &["AllocationId", "PublicIp"],
            Self::NatGateway => &["NatGatewayId"],
            Self::SecurityGroup => &["GroupId", "VpcId"],
            Self::LaunchTemplate => &["DefaultVersionNumber", "LatestVersionNumber", "LaunchTemplateId"],
            Self::LogGroup | Self::InstanceProfile | Self::Cluster | Self::ScalingPolicy => &["Arn"],
            Self::Role => &["Arn", "RoleId"],
            Self::TaskDefinition => &["TaskDefinitionArn"],
            Self::Service => &["Name", "ServiceArn"],
            Self::LoadBalancer => &[
                "CanonicalHostedZoneID",
                "DNSName",
                "LoadBalancerArn",
                "LoadBalancerFullName",
                "LoadBalancerName",
                "SecurityGroups",
            ],
            Self::TargetGroup => &["LoadBalancerArns", "TargetGroupArn", "TargetGroupFullName", "TargetGroupName"],
            Self::Listener => &["ListenerArn"],
            Self::GatewayAttachment
            | Self::Route
            | Self::AutoScalingGroup
            | Self::CapacityProvider
            | Self::CapacityProviderAssociation => &[],
        }
    }

    #[must_use]
    pub const fn tag_style(self) -> TagStyle {
        match self {
            Self::Vpc
            | Self::InternetGateway
            | Self::Subnet
            | Self::RouteTable
            | Self::ElasticIp
            | Self::NatGateway
            | Self::SecurityGroup
            | Self::Secret
            | Self::LogGroup
            | Self::Role
            | Self::Cluster
            | Self::CapacityProvider
            | Self::TaskDefinition
            | Self::Service
            | Self::LoadBalancer
            | Self::TargetGroup => TagStyle::KeyValueList,
            Self::AutoScalingGroup => TagStyle::Propagating,
            Self::GatewayAttachment
            | Self::Route
            | Self::SubnetRouteTableAssociation
            | Self::SecurityGroupIngress
            | Self::LaunchTemplate
            | Self::InstanceProfile
            | Self::CapacityProviderAssociation
            | Self::Listener
            | Self::ScalableTarget
            | Self::ScalingPolicy => TagStyle::Untagged,
        }
    }
}
